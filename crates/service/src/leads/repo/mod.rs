pub mod seaorm;

pub use seaorm::SeaOrmLeadRepository;
