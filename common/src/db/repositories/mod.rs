// Repository layer for database operations

pub mod announcement;
pub mod credentials;
pub mod demo;
pub mod group;
pub mod membership_request;
pub mod musician;
pub mod queries;

pub use announcement::{AnnouncementFilter, AnnouncementRepository};
pub use credentials::CredentialsRepository;
pub use demo::DemoRepository;
pub use group::{GroupFilter, GroupRepository};
pub use membership_request::MembershipRequestRepository;
pub use musician::{MusicianFilter, MusicianRepository};
