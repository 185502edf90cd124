pub mod seaorm;

pub use seaorm::SeaOrmCredentialRepository;
