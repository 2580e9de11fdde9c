use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};
use structopt::StructOpt;

use fernc::codegen::Target;

fn main() {
    env_logger::init();
    if let Err(ref e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let opt = Opt::from_args();
    let source = fs::read_to_string(&opt.file)?;
    let target = opt.target.unwrap_or_else(Target::host);
    debug!("compiling {} for {}", opt.file.display(), target);

    let asm = fernc::compile_to_assembly(&source, target)?;

    let asm_file = opt
        .output
        .unwrap_or_else(|| opt.file.with_extension("s"));
    fs::write(&asm_file, asm + "\n")?;
    info!("wrote {}", asm_file.display());

    if !opt.no_link {
        assemble_and_link(target, &asm_file)?;
    }
    Ok(())
}

/// Hands the assembly text over to the system toolchain, producing `out` in
/// the working directory.
fn assemble_and_link(target: Target, asm_file: &Path) -> Result<(), Box<dyn Error>> {
    let object = asm_file.with_extension("o");
    match target {
        Target::X86_64Linux => {
            run_tool(
                Command::new("nasm")
                    .arg("-felf64")
                    .arg(asm_file)
                    .arg("-o")
                    .arg(&object),
            )?;
            run_tool(Command::new("ld").arg(&object).arg("-o").arg("out"))?;
        }
        Target::Arm64Darwin => {
            run_tool(
                Command::new("as")
                    .arg("-arch")
                    .arg("arm64")
                    .arg("-o")
                    .arg(&object)
                    .arg(asm_file),
            )?;
            run_tool(Command::new("cc").arg(&object).arg("-o").arg("out"))?;
        }
    }
    info!("linked ./out");
    Ok(())
}

fn run_tool(command: &mut Command) -> Result<(), Box<dyn Error>> {
    debug!("running {:?}", command);
    let status = command.status()?;
    if !status.success() {
        return Err(format!("{:?} failed with {}", command, status).into());
    }
    Ok(())
}

#[derive(Debug, StructOpt)]
struct Opt {
    /// The file to compile
    #[structopt(parse(from_os_str))]
    file: PathBuf,
    /// The (optional) assembly output file
    #[structopt(short = "o", long = "output", parse(from_os_str))]
    output: Option<PathBuf>,
    /// Override the backend (x86_64-linux or arm64-darwin)
    #[structopt(long = "target")]
    target: Option<Target>,
    /// Stop after writing the assembly file
    #[structopt(long = "no-link")]
    no_link: bool,
}
