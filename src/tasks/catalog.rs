//! Implementation-reference to task-object bindings.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::builtin::{CommandTask, EmitTask, LogTask};
use super::Task;

/// Maps implementation references (`class_path` values) to tasks.
#[derive(Clone, Default)]
pub struct TaskCatalog {
    tasks: BTreeMap<String, Arc<dyn Task>>,
}

impl TaskCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog holding the built-in tasks.
    pub fn with_builtins() -> Self {
        Self::new()
            .register(LogTask::IMPLEMENTATION, LogTask)
            .register(EmitTask::IMPLEMENTATION, EmitTask)
            .register(CommandTask::IMPLEMENTATION, CommandTask)
    }

    /// Bind `implementation` to `task`, replacing any earlier binding.
    pub fn register(mut self, implementation: impl Into<String>, task: impl Task + 'static) -> Self {
        self.tasks.insert(implementation.into(), Arc::new(task));
        self
    }

    /// Bind an already shared task object.
    pub fn register_shared(mut self, implementation: impl Into<String>, task: Arc<dyn Task>) -> Self {
        self.tasks.insert(implementation.into(), task);
        self
    }

    /// Look up the task bound to `implementation`.
    pub fn get(&self, implementation: &str) -> Option<Arc<dyn Task>> {
        self.tasks.get(implementation).cloned()
    }

    pub fn contains(&self, implementation: &str) -> bool {
        self.tasks.contains_key(implementation)
    }

    /// Bound implementation references, sorted.
    pub fn implementations(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }
}

impl fmt::Debug for TaskCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskCatalog")
            .field("implementations", &self.tasks.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Outputs;
    use crate::registry::OptionMap;
    use crate::tasks::TaskContext;

    struct Noop;

    impl Task for Noop {
        fn execute(&self, _options: &OptionMap, _ctx: &TaskContext<'_>) -> crate::Result<Outputs> {
            Ok(Outputs::new())
        }
    }

    #[test]
    fn builtins_are_registered() {
        let catalog = TaskCatalog::with_builtins();
        let names: Vec<_> = catalog.implementations().collect();
        assert_eq!(
            names,
            vec![
                "orgflow.tasks.Command",
                "orgflow.tasks.Emit",
                "orgflow.tasks.Log"
            ]
        );
    }

    #[test]
    fn register_replaces_binding() {
        let catalog = TaskCatalog::with_builtins().register("orgflow.tasks.Log", Noop);
        let task = catalog.get("orgflow.tasks.Log").unwrap();
        assert!(task.accepted_options().is_none());
    }

    #[test]
    fn unknown_implementation_is_absent() {
        let catalog = TaskCatalog::new();
        assert!(catalog.get("acme.Deploy").is_none());
        assert!(!catalog.contains("acme.Deploy"));
    }
}
