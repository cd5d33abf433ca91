pub mod article;

pub use article::{ArticleQuery, ArticleRepository, ArticleStore};
