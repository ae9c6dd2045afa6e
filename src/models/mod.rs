pub mod activities;
pub mod pagination;
pub mod photos;
pub mod profiles;
pub mod users;
pub mod validation;

pub use activities::{ActivityDto, ActivityForm, ActivityRow, AttendeeProfile, AttendeeRow, Category};
pub use pagination::{PagedList, PaginationHeader, PagingParams};
pub use photos::{PhotoDto, PhotoRow};
pub use profiles::{ProfileDto, ProfileEditForm, ProfileRow, UserActivityDto, UserActivityRow};
pub use users::{LoginForm, RegisterForm, UserDto, UserRow};
