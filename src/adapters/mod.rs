/// Adapters layer - Infrastructure implementations
///
/// Concrete implementations of the outbound ports: snapshot input,
/// report formatting and output, console progress.
pub mod outbound;
