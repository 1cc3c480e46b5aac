use wirekit_domain::Result;

/// Invoked once after the container has been refreshed, in component order
pub trait ApplicationRunner: Send + Sync {
    fn run(&self) -> Result<()>;
}
