use hvl_types::BatchId;

/// Source of candidate batch identifiers.
///
/// Candidates need not be unique; the service checks each one against the
/// ledger and asks again on collision.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> BatchId;
}

/// Random 8-hex-character identifiers (see [`BatchId::random`]).
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn generate(&self) -> BatchId {
        BatchId::random()
    }
}

impl<F> IdGenerator for F
where
    F: Fn() -> BatchId + Send + Sync,
{
    fn generate(&self) -> BatchId {
        self()
    }
}
