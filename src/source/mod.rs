//! Media sources: metadata, audio download, and published captions.

pub mod captions;
pub mod command;
pub mod http;
pub mod media;
pub mod video_id;
pub mod ytdlp;

pub use captions::{
    CaptionFetcher, CaptionFragment, Json3CaptionFetcher, MockCaptionFetcher, join_fragments,
    select_track,
};
pub use command::{CommandRunner, MockCommandRunner, SystemCommandRunner};
pub use http::HttpAudioDownloader;
pub use media::{
    AudioDownloader, AudioStream, BareUrlInspector, CaptionTrack, MediaInfo, MediaInspector,
    MockDownloader, MockInspector,
};
pub use video_id::extract_video_id;
pub use ytdlp::YtDlp;
