use crate::query::{Filter, Order, SortSpec};

#[derive(Debug, Clone)]
pub enum Accumulator {
    /// Arithmetic mean of the numeric values at the path; `null` when none are numeric.
    Avg(String),
    Sum(String),
    Count,
}

#[derive(Debug, Clone)]
pub enum ProjectExpr {
    /// Copies the value at a (possibly dotted) path.
    Field(String),
    /// Sums `field` over the documents of the array at `array`; 0 when absent or empty.
    ArraySum { array: String, field: String },
}

#[derive(Debug, Clone)]
pub enum Stage {
    Match(Filter),
    /// Emits one row per element of the top-level array field.
    Unwind(String),
    Group { key: String, accumulators: Vec<(String, Accumulator)> },
    Project(Vec<(String, ProjectExpr)>),
    Sort(Vec<SortSpec>),
    Limit(usize),
}

/// An ordered list of stages. Stages run exactly in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    #[must_use]
    pub fn matching(self, filter: Filter) -> Self {
        self.stage(Stage::Match(filter))
    }

    #[must_use]
    pub fn unwind(self, field: impl Into<String>) -> Self {
        self.stage(Stage::Unwind(field.into()))
    }

    #[must_use]
    pub fn group<S: Into<String>>(self, key: impl Into<String>, accumulators: Vec<(S, Accumulator)>) -> Self {
        let accumulators = accumulators.into_iter().map(|(n, a)| (n.into(), a)).collect();
        self.stage(Stage::Group { key: key.into(), accumulators })
    }

    /// Projects each dotted path into a top-level field named after its last segment.
    #[must_use]
    pub fn project_paths(self, paths: &[&str]) -> Self {
        let fields = paths
            .iter()
            .map(|p| {
                let name = p.rsplit('.').next().unwrap_or(p).to_string();
                (name, ProjectExpr::Field((*p).to_string()))
            })
            .collect();
        self.stage(Stage::Project(fields))
    }

    #[must_use]
    pub fn project(self, fields: Vec<(String, ProjectExpr)>) -> Self {
        self.stage(Stage::Project(fields))
    }

    #[must_use]
    pub fn sort(self, field: impl Into<String>, order: Order) -> Self {
        self.stage(Stage::Sort(vec![SortSpec { field: field.into(), order }]))
    }

    #[must_use]
    pub fn limit(self, n: usize) -> Self {
        self.stage(Stage::Limit(n))
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }
}
