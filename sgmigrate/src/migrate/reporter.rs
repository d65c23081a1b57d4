use std::sync::Arc;

use config_trace::{Source, Traced};
use indexmap::IndexMap;
use serde::Serialize;

use crate::translate::{TranslateError, Translator};

const TARGET_NAME: &str = "Search Guard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    /// Carried over, but not exactly.
    Problem,
    /// No equivalent concept exists in the target.
    Inconvertible,
    /// The source relied on a default value.
    DefaultApplied,
}

/// One observation made while migrating. Never aborts a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Problem {
    pub kind: ProblemKind,
    pub severity: Severity,
    pub message: String,
    /// `None` for problems that are not about one setting.
    pub source: Option<Source>,
    pub value: Option<String>,
}

impl Problem {
    pub fn path(&self) -> Option<String> {
        self.source.as_ref().map(Source::full_path_string)
    }
}

/// Collects the problems of exactly one migration run, in emission order.
#[derive(Debug)]
pub struct MigrationReporter {
    translator: Arc<Translator>,
    problems: Vec<Problem>,
}

impl MigrationReporter {
    pub fn new(translator: Arc<Translator>) -> Self {
        Self {
            translator,
            problems: Vec::new(),
        }
    }

    /// Resolve `{KEY}` tokens of a message template.
    pub fn translate(&self, template: &str) -> Result<String, TranslateError> {
        self.translator.translate(template)
    }

    pub fn problem(&mut self, subject: &dyn Traced, message: impl Into<String>) {
        self.push(ProblemKind::Problem, Severity::Warning, Some(subject), message.into());
    }

    pub fn inconvertible(&mut self, subject: &dyn Traced, message: impl Into<String>) {
        self.push(ProblemKind::Inconvertible, Severity::Warning, Some(subject), message.into());
    }

    /// A problem that concerns no single setting.
    pub fn general(&mut self, message: impl Into<String>) {
        self.push(ProblemKind::Problem, Severity::Warning, None, message.into());
    }

    pub fn default_applied(&mut self, subject: &dyn Traced) -> Result<(), TranslateError> {
        let message = self.translate("{DEFAULT_APPLIED}")?;
        self.push(ProblemKind::DefaultApplied, Severity::Info, Some(subject), message);
        Ok(())
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    fn push(
        &mut self,
        kind: ProblemKind,
        severity: Severity,
        subject: Option<&dyn Traced>,
        message: String,
    ) {
        self.problems.push(Problem {
            kind,
            severity,
            message,
            source: subject.map(|subject| subject.source().clone()),
            value: subject.and_then(|subject| subject.describe()),
        });
    }

    /// Markdown-style report grouping messages by the setting they are about.
    pub fn generate_report(&self, title: &str) -> String {
        let mut out = format!("# {title}\n");
        for section in self.sections() {
            if section.subjects.is_empty() {
                continue;
            }
            out.push_str(&format!("\n{} {}:\n", section.count(), section.description));
            for ((path, value), messages) in &section.subjects {
                match (path, value) {
                    (Some(path), Some(value)) => out.push_str(&format!("* {path}: {value}\n")),
                    (Some(path), None) => out.push_str(&format!("* {path}\n")),
                    (None, _) => {}
                }
                let indent = if path.is_some() { "  * " } else { "* " };
                for message in messages {
                    out.push_str(indent);
                    out.push_str(message);
                    out.push('\n');
                }
            }
        }
        out
    }

    /// One line per section with its number of affected settings.
    pub fn generate_summary(&self, title: &str) -> String {
        let mut out = format!("{title} summary:");
        let mut any = false;
        for section in self.sections() {
            let count = section.count();
            if count > 0 {
                any = true;
                out.push_str(&format!("\n\t* {count} {}", section.description));
            }
        }
        if !any {
            out.push_str("\n\tNo issues were found.");
        }
        out
    }

    fn sections(&self) -> Vec<Section<'_>> {
        let mut inconvertible = Section::new(format!(
            "setting(s) cannot be converted because no equivalent concept exists in {TARGET_NAME}"
        ));
        let mut problems = Section::new("setting(s) caused problem(s)".to_string());
        let mut general = Section::new("other problem(s)".to_string());
        let mut defaults = Section::new("setting(s) use a default value".to_string());

        for problem in &self.problems {
            let section = match (problem.kind, problem.source.is_some()) {
                (ProblemKind::Inconvertible, _) => &mut inconvertible,
                (ProblemKind::DefaultApplied, _) => &mut defaults,
                (ProblemKind::Problem, true) => &mut problems,
                (ProblemKind::Problem, false) => &mut general,
            };
            section.add(problem);
        }
        vec![inconvertible, problems, general, defaults]
    }
}

type SubjectKey = (Option<String>, Option<String>);

struct Section<'a> {
    description: String,
    subjects: IndexMap<SubjectKey, Vec<&'a str>>,
}

impl<'a> Section<'a> {
    fn new(description: String) -> Self {
        Self {
            description,
            subjects: IndexMap::new(),
        }
    }

    /// Settings count once; problems without a setting count per message.
    fn count(&self) -> usize {
        self.subjects
            .iter()
            .map(|((path, _), messages)| if path.is_some() { 1 } else { messages.len() })
            .sum()
    }

    fn add(&mut self, problem: &'a Problem) {
        self.subjects
            .entry((problem.path(), problem.value.clone()))
            .or_default()
            .push(&problem.message);
    }
}
