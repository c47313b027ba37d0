pub mod notification;

pub use notification::{
    ArticleCreated, ArticleUpdated, DeleteResponse, Envelope, LikeData, Notification,
    ResponseStatus, UploadData, ValidationErrors,
};
