//! Entity module - Contains all SeaORM entity definitions for the document store.
//! Each collection of the store is one table; each entity has a Model struct for
//! data and an Entity struct for operations.

pub mod account;
pub mod class;
pub mod common;
pub mod session;
pub mod student;
pub mod teacher;
pub mod user;

// Re-export specific types to avoid conflicts
pub use account::{Column as AccountColumn, Entity as Account, Model as AccountModel};
pub use class::{Column as ClassColumn, Entity as SchoolClass, Model as ClassModel};
pub use common::{Gender, Grade, StringList};
pub use session::{Column as SessionColumn, Entity as Session, Model as SessionModel};
pub use student::{Column as StudentColumn, Entity as Student, Model as StudentModel};
pub use teacher::{Column as TeacherColumn, Entity as Teacher, Model as TeacherModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
