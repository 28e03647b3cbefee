use itertools::Itertools;

pub const NONE_PLACEHOLDER: &str = "none";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMark {
    #[default]
    Neutral,
    Included,
    Excluded,
}

impl FilterMark {
    pub fn next(self) -> Self {
        match self {
            Self::Neutral => Self::Included,
            Self::Included => Self::Excluded,
            Self::Excluded => Self::Neutral,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Neutral => " ",
            Self::Included => "+",
            Self::Excluded => "-",
        }
    }
}

/// Tri-state category filter. Only non-neutral labels are stored, in the
/// order they reached their current mark, so a label can never be included
/// and excluded at once.
#[derive(Clone, Debug, Default)]
pub struct FilterState {
    marks: Vec<(String, FilterMark)>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self, label: &str) -> FilterMark {
        self.marks
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, m)| *m)
            .unwrap_or_default()
    }

    /// Advances `label` one step through neutral, included, excluded and
    /// returns the new mark.
    pub fn toggle(&mut self, label: &str) -> FilterMark {
        let next = self.mark(label).next();
        self.marks.retain(|(l, _)| l != label);
        if next != FilterMark::Neutral {
            self.marks.push((label.to_string(), next));
        }
        next
    }

    pub fn set(&mut self, label: &str, mark: FilterMark) {
        self.marks.retain(|(l, _)| l != label);
        if mark != FilterMark::Neutral {
            self.marks.push((label.to_string(), mark));
        }
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn included(&self) -> Vec<&str> {
        self.labels_with(FilterMark::Included)
    }

    pub fn excluded(&self) -> Vec<&str> {
        self.labels_with(FilterMark::Excluded)
    }

    fn labels_with(&self, mark: FilterMark) -> Vec<&str> {
        self.marks
            .iter()
            .filter(|(_, m)| *m == mark)
            .map(|(l, _)| l.as_str())
            .collect()
    }

    pub fn summary(&self) -> FilterSummary {
        FilterSummary {
            included: join_or_none(&self.included()),
            excluded: join_or_none(&self.excluded()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterSummary {
    pub included: String,
    pub excluded: String,
}

fn join_or_none(labels: &[&str]) -> String {
    if labels.is_empty() {
        NONE_PLACEHOLDER.to_string()
    } else {
        labels.iter().join(", ")
    }
}
