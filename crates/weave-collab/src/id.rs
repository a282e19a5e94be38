/// Opaque 128-bit identifier source for executions and continuations (§6).
pub trait IdGenerator: Send + Sync {
  fn new_id(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
  fn new_id(&self) -> String {
    uuid::Uuid::new_v4().to_string()
  }
}
