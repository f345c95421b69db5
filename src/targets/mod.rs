//! Registry of functions that can be timed from the command line.
//!
//! Targets are grouped into modules (`growth`, `sorting`) and looked up by
//! `module` + `function` name. Each entry records the complexity it is built to
//! exhibit, which the report uses as a sanity check next to the estimate.

use crate::domain::ModelKind;
use crate::error::RegistryError;

pub mod builtin;

/// Failure raised by a target function itself.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct TargetError(pub String);

/// Signature shared by every registered function.
pub type TargetFn = fn(&[u64]) -> Result<u64, TargetError>;

/// One timeable function.
#[derive(Debug, Clone, Copy)]
pub struct Target {
    pub name: &'static str,
    pub summary: &'static str,
    /// Growth the function is written to exhibit.
    pub expected: ModelKind,
    pub run: TargetFn,
}

impl Target {
    pub fn call(&self, input: &[u64]) -> Result<u64, TargetError> {
        (self.run)(input)
    }
}

/// A named group of targets.
#[derive(Debug, Clone, Copy)]
pub struct Module {
    pub name: &'static str,
    pub summary: &'static str,
    pub targets: &'static [Target],
}

/// All registered modules.
pub fn modules() -> &'static [Module] {
    builtin::MODULES
}

pub fn find_module(name: &str) -> Result<&'static Module, RegistryError> {
    modules()
        .iter()
        .find(|m| m.name == name)
        .ok_or_else(|| RegistryError::UnknownModule {
            name: name.to_string(),
            available: modules().iter().map(|m| m.name.to_string()).collect(),
        })
}

/// Resolve `module::function`.
pub fn resolve(module: &str, function: &str) -> Result<&'static Target, RegistryError> {
    let m = find_module(module)?;
    m.targets
        .iter()
        .find(|t| t.name == function)
        .ok_or_else(|| RegistryError::UnknownFunction {
            module: module.to_string(),
            name: function.to_string(),
            available: m.targets.iter().map(|t| t.name.to_string()).collect(),
        })
}

/// Resolve several functions of one module, in the order given.
///
/// Fails on the first unknown name.
pub fn resolve_all(module: &str, functions: &[String]) -> Result<Vec<&'static Target>, RegistryError> {
    functions.iter().map(|f| resolve(module, f)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_functions() {
        let t = resolve("sorting", "merge_sort").unwrap();
        assert_eq!(t.name, "merge_sort");
        assert_eq!(t.expected, ModelKind::Linearithmic);

        let ts = resolve_all("growth", &["linear".to_string(), "constant".to_string()]).unwrap();
        assert_eq!(ts.iter().map(|t| t.name).collect::<Vec<_>>(), vec!["linear", "constant"]);
    }

    #[test]
    fn unknown_names_list_alternatives() {
        let err = resolve("nope", "x").unwrap_err();
        assert!(err.to_string().contains("growth"));
        assert!(err.to_string().contains("sorting"));

        let err = resolve("growth", "factorial").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownFunction { .. }));
        assert!(err.to_string().contains("quadratic"));
    }

    #[test]
    fn names_are_unique() {
        let mut modules: Vec<&str> = modules().iter().map(|m| m.name).collect();
        modules.sort_unstable();
        modules.dedup();
        assert_eq!(modules.len(), super::modules().len());

        for m in super::modules() {
            let mut names: Vec<&str> = m.targets.iter().map(|t| t.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), m.targets.len(), "duplicate in {}", m.name);
        }
    }
}
