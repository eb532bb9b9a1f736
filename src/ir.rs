/// One statement of a parsed program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Leaf { label: String },
    Terminal { label: String },
    Input { label: String },
    Conditional(Conditional),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional {
    pub label: String,
    pub on_true: Sequence,
    pub on_false: Sequence,
}

/// Statements evaluated in order. A missing branch is an empty sequence,
/// never an absent one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    pub items: Vec<Statement>,
}

impl Statement {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self::Leaf {
            label: label.into(),
        }
    }

    pub fn terminal(label: impl Into<String>) -> Self {
        Self::Terminal {
            label: label.into(),
        }
    }

    pub fn input(label: impl Into<String>) -> Self {
        Self::Input {
            label: label.into(),
        }
    }

    pub fn conditional(label: impl Into<String>, on_true: Sequence, on_false: Sequence) -> Self {
        Self::Conditional(Conditional {
            label: label.into(),
            on_true,
            on_false,
        })
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Leaf { label } | Self::Terminal { label } | Self::Input { label } => label,
            Self::Conditional(cond) => &cond.label,
        }
    }
}

impl Sequence {
    pub fn new(items: Vec<Statement>) -> Self {
        Self { items }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Number of statements including those nested in branches.
    pub fn statement_count(&self) -> usize {
        self.items
            .iter()
            .map(|item| match item {
                Statement::Conditional(cond) => {
                    1 + cond.on_true.statement_count() + cond.on_false.statement_count()
                }
                _ => 1,
            })
            .sum()
    }
}

impl From<Vec<Statement>> for Sequence {
    fn from(items: Vec<Statement>) -> Self {
        Self::new(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_count_includes_branches() {
        let program = Sequence::new(vec![
            Statement::leaf("a"),
            Statement::conditional(
                "x",
                Sequence::new(vec![Statement::leaf("b"), Statement::leaf("c")]),
                Sequence::new(vec![Statement::input("d")]),
            ),
        ]);
        assert_eq!(program.len(), 2);
        assert_eq!(program.statement_count(), 5);
    }

    #[test]
    fn label_reads_every_variant() {
        assert_eq!(Statement::leaf("a").label(), "a");
        assert_eq!(Statement::terminal("Begin").label(), "Begin");
        assert_eq!(Statement::input("n").label(), "n");
        let cond = Statement::conditional("x > 0", Sequence::empty(), Sequence::empty());
        assert_eq!(cond.label(), "x > 0");
    }
}
