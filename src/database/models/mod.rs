pub mod user;
pub mod category;
pub mod course;
pub mod lesson;
pub mod enrollment;
pub mod progress;
pub mod review;
pub mod discussion;

pub use user::User;
pub use category::Category;
pub use course::Course;
pub use lesson::Lesson;
pub use enrollment::Enrollment;
pub use progress::LessonProgress;
pub use review::Review;
pub use discussion::{Discussion, Reply};
