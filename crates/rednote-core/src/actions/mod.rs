//! Account actions: login, publishing, comments and reactions.

mod comment;
mod interact;
mod login;
mod publish;

pub use comment::CommentAction;
pub use interact::{InteractAction, Reaction};
pub use login::{
    format_timeout, split_data_url, LoginAction, LoginCompletion, LoginWatcher, QrCode,
};
pub use publish::{
    title_length, validate_schedule, validate_title, PublishAction, PublishImageContent,
    PublishVideoContent, MAX_TITLE_LENGTH,
};
