mod article;
mod user;

pub use article::{join_tags, split_tags, Article, ArticleStatus};
pub use user::User;
