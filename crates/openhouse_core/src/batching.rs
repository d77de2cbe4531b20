/// Maximum put/delete requests accepted by a single batch write.
pub const BATCH_WRITE_MAX: usize = 25;
/// Maximum keys accepted by a single batch get.
pub const BATCH_GET_MAX: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOperation {
    Write,
    Get,
}

impl BatchOperation {
    pub fn max_items(self) -> usize {
        match self {
            Self::Write => BATCH_WRITE_MAX,
            Self::Get => BATCH_GET_MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkAssignment {
    pub chunk_id: usize,
    pub start_index: usize,
    pub end_index_exclusive: usize,
}

impl ChunkAssignment {
    pub fn len(&self) -> usize {
        self.end_index_exclusive - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkPlanError {
    #[error("chunk size must be a positive integer")]
    ZeroChunkSize,
    #[error("chunk boundaries do not cover all {total_items} items")]
    IncompleteCoverage { total_items: usize },
}

/// Splits `total_items` into consecutive chunks of at most `max_chunk_size`.
/// An empty input yields an empty plan.
pub fn plan_chunks(
    total_items: usize,
    max_chunk_size: usize,
) -> Result<Vec<ChunkAssignment>, ChunkPlanError> {
    if max_chunk_size == 0 {
        return Err(ChunkPlanError::ZeroChunkSize);
    }

    let chunk_count = total_items.div_ceil(max_chunk_size);
    let mut assignments = Vec::with_capacity(chunk_count);
    let mut cursor = 0usize;

    for chunk_id in 0..chunk_count {
        let end_index_exclusive = (cursor + max_chunk_size).min(total_items);
        assignments.push(ChunkAssignment {
            chunk_id,
            start_index: cursor,
            end_index_exclusive,
        });
        cursor = end_index_exclusive;
    }

    validate_assignments(total_items, &assignments)?;
    Ok(assignments)
}

pub fn plan_for(
    operation: BatchOperation,
    total_items: usize,
) -> Result<Vec<ChunkAssignment>, ChunkPlanError> {
    plan_chunks(total_items, operation.max_items())
}

fn validate_assignments(
    total_items: usize,
    assignments: &[ChunkAssignment],
) -> Result<(), ChunkPlanError> {
    let covered: usize = assignments.iter().map(ChunkAssignment::len).sum();
    let contiguous = assignments
        .windows(2)
        .all(|pair| pair[0].end_index_exclusive == pair[1].start_index);

    if covered != total_items || !contiguous || assignments.iter().any(ChunkAssignment::is_empty) {
        return Err(ChunkPlanError::IncompleteCoverage { total_items });
    }

    Ok(())
}
