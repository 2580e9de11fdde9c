use std::fmt;

use itertools::Itertools;

/// One line of the output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assembly {
    Directive(String),
    Label(String),
    Instruction(String),
    Comment(String),
}

impl fmt::Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Directive(directive) => f.write_str(directive),
            Self::Label(name) => write!(f, "{}:", name),
            Self::Instruction(instruction) => write!(f, "    {}", instruction),
            Self::Comment(comment) => write!(f, "    ;; {}", comment),
        }
    }
}

#[derive(Debug, Default)]
pub struct AssemblyOutput {
    lines: Vec<Assembly>,
}

impl AssemblyOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, asm: Assembly) {
        self.lines.push(asm);
    }

    pub fn directive(&mut self, text: impl Into<String>) {
        self.push(Assembly::Directive(text.into()));
    }

    pub fn instruction(&mut self, text: impl Into<String>) {
        self.push(Assembly::Instruction(text.into()));
    }

    pub fn label(&mut self, label: Label) {
        self.push(Assembly::Label(label.to_string()));
    }

    pub fn named_label(&mut self, name: impl Into<String>) {
        self.push(Assembly::Label(name.into()));
    }

    pub fn comment(&mut self, text: impl Into<String>) {
        self.push(Assembly::Comment(text.into()));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Assembly> {
        self.lines.iter()
    }
}

impl fmt::Display for AssemblyOutput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.lines.iter().join("\n"))
    }
}

/// Jump target. The index comes from a single monotonic counter, so every
/// label in one compilation is unique; the tag is a readability prefix only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    tag: Option<&'static str>,
    index: usize,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.tag {
            Some(tag) => write!(f, "{}label{}", tag, self.index),
            None => write!(f, "label{}", self.index),
        }
    }
}

#[derive(Debug, Default)]
pub struct LabelAllocator {
    next: usize,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> Label {
        self.tagged_opt(None)
    }

    pub fn tagged(&mut self, tag: &'static str) -> Label {
        self.tagged_opt(Some(tag))
    }

    fn tagged_opt(&mut self, tag: Option<&'static str>) -> Label {
        let index = self.next;
        self.next += 1;
        Label { tag, index }
    }
}
