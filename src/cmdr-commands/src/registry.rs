//! Ordered registry of user commands.

use crate::command::Command;

/// Registry of user commands.
///
/// Commands keep their registration order, which is the order they are
/// listed in usage output. Names are not required to be unique; lookups
/// return the first command registered under a name.
#[derive(Debug, Default, Clone)]
pub struct CommandRegistry {
    commands: Vec<Command>,
}

impl CommandRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register a command at the end of the list.
    pub fn register(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Get a command by name.
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|cmd| cmd.name() == name)
    }

    /// Get a mutable command by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Command> {
        self.commands.iter_mut().find(|cmd| cmd.name() == name)
    }

    /// Check if a command exists by name.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.iter().any(|cmd| cmd.name() == name)
    }

    /// Get all command names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(Command::name).collect()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl<'a> IntoIterator for &'a CommandRegistry {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_register_and_get() {
        let mut registry = CommandRegistry::new();
        registry.register(Command::new("test", "A test command"));

        assert!(registry.contains("test"));
        assert_eq!(registry.get("test").map(Command::name), Some("test"));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_registration_order_is_kept() {
        let mut registry = CommandRegistry::new();
        for name in ["init", "build", "deploy"] {
            registry.register(Command::new(name, name));
        }

        assert_eq!(registry.names(), vec!["init", "build", "deploy"]);
        assert_eq!(
            (&registry).into_iter().map(Command::name).collect::<Vec<_>>(),
            registry.names()
        );
    }

    #[test]
    fn test_first_registration_wins() {
        let mut registry = CommandRegistry::new();
        registry.register(Command::new("dup", "First"));
        registry.register(Command::new("dup", "Second"));

        assert_eq!(registry.get("dup").map(Command::usage), Some("First"));
        assert_eq!(registry.get_mut("dup").map(|c| c.usage().to_string()), Some("First".to_string()));
        assert_eq!(registry.names(), vec!["dup", "dup"]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = CommandRegistry::default();
        assert!(registry.is_empty());
        assert!(!registry.contains("anything"));
        assert!((&registry).into_iter().next().is_none());
    }
}
