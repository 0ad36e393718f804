//! Generation pipeline: workers, hand-off channel, batch writer, supervisor.

pub mod channel;
pub mod supervisor;
pub mod worker;
pub mod writer;

pub use channel::{
    CandidateReceiver, CandidateSender, ChannelGauge, PopOutcome, PushOutcome, channel,
};
pub use supervisor::{Liveness, RunSummary, Supervisor};
pub use worker::{GeneratorWorker, WorkerReport};
pub use writer::{BatchWriter, WriterReport};
