mod outbox;

pub use outbox::OutboxNotifier;
