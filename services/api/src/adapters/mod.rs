pub mod consultation;
pub mod db;

pub use consultation::OpenAiConsultationAdapter;
pub use db::DbAdapter;
