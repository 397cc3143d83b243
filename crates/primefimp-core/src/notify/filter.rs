// ── Notification filter ──

use primefimp_api::{Command, ComponentType, NotifyEvent};

/// Selects which notifications a registration receives.
///
/// An unset field matches anything, so [`NotifyFilter::all`] passes every
/// event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NotifyFilter {
    pub command: Option<Command>,
    pub component: Option<ComponentType>,
}

impl NotifyFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn command(command: Command) -> Self {
        Self {
            command: Some(command),
            component: None,
        }
    }

    pub fn component(component: ComponentType) -> Self {
        Self {
            command: None,
            component: Some(component),
        }
    }

    pub fn new(command: Command, component: ComponentType) -> Self {
        Self {
            command: Some(command),
            component: Some(component),
        }
    }

    pub fn matches(&self, event: &NotifyEvent) -> bool {
        self.command.is_none_or(|cmd| cmd == event.cmd)
            && self.component.is_none_or(|c| c == event.component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_are_wildcards() {
        let event = NotifyEvent::new(Command::Add, ComponentType::Area);

        assert!(NotifyFilter::all().matches(&event));
        assert!(NotifyFilter::command(Command::Add).matches(&event));
        assert!(NotifyFilter::component(ComponentType::Area).matches(&event));
        assert!(NotifyFilter::new(Command::Add, ComponentType::Area).matches(&event));
    }

    #[test]
    fn both_fields_must_match() {
        let event = NotifyEvent::new(Command::Delete, ComponentType::Area);

        assert!(!NotifyFilter::new(Command::Add, ComponentType::Area).matches(&event));
        assert!(!NotifyFilter::new(Command::Delete, ComponentType::Room).matches(&event));
        assert!(!NotifyFilter::command(Command::Edit).matches(&event));
    }
}
