/// An event stamped with the frame it was emitted in.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<E> {
    pub frame_index: u64,
    pub event: E,
}

/// Outbox of events for the host UI.
///
/// Events are queued in emission order and drained by the host after each
/// dispatch; the core never calls back into UI code directly.
#[derive(Debug)]
pub struct EventBus<E> {
    frame_index: u64,
    events: Vec<Stamped<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            frame_index: 0,
            events: Vec::new(),
        }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame index stamped on subsequent events.
    pub fn set_frame_index(&mut self, frame_index: u64) {
        self.frame_index = frame_index;
    }

    pub fn emit(&mut self, event: E) {
        self.events.push(Stamped {
            frame_index: self.frame_index,
            event,
        });
    }

    pub fn events(&self) -> &[Stamped<E>] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Stamped<E>> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;

    #[test]
    fn records_events_with_frame_index() {
        let mut bus = EventBus::new();
        bus.set_frame_index(2);
        bus.emit("hello");
        assert_eq!(bus.events().len(), 1);
        assert_eq!(bus.events()[0].frame_index, 2);
        assert_eq!(bus.events()[0].event, "hello");
    }

    #[test]
    fn drain_clears_events_in_order() {
        let mut bus = EventBus::new();
        bus.emit(1);
        bus.emit(2);
        let drained: Vec<i32> = bus.drain().into_iter().map(|s| s.event).collect();
        assert_eq!(drained, vec![1, 2]);
        assert!(bus.is_empty());
    }
}
