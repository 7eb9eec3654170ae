pub mod bookings;
pub mod lawyers;
pub mod legal_info;
pub mod reviews;
pub mod users;

pub use bookings::Entity as Bookings;
pub use lawyers::Entity as Lawyers;
pub use legal_info::Entity as LegalInfo;
pub use reviews::Entity as Reviews;
pub use users::Entity as Users;
