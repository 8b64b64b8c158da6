// ==========================================
// Foundry QC Tracker - pipe repository
// ==========================================
// Tables: pipes, pipe_stages, pipe_stage_history
// Stage writes and their history snapshot commit in one transaction
// ==========================================

mod pipes;
mod stages;


pub use pipes::PipeRepository;
