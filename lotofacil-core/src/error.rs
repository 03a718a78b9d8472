use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Historique vide : aucune ligne ne contient 15 numéros valides")]
    EmptyHistory,

    #[error("Tirage invalide : {0}")]
    InvalidDraw(String),

    #[error("Requête de génération invalide : {0}")]
    InvalidRequest(String),

    #[error("Configuration invalide : {0}")]
    Config(String),

    #[error("E/S : {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON : {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
