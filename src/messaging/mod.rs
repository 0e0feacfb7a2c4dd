// Messaging module
// Named notification channels, subscriber registry, diagnostics

pub mod diagnostic;
pub mod registry;

pub use diagnostic::{Diagnostic, DiagnosticKind, DiagnosticLevel};
pub use registry::{Channel, ListenerRegistry, Payload, PhaseChannel};
