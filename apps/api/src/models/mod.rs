pub mod portfolio;

pub use portfolio::{
    Education, Experience, PaymentStatus, Portfolio, PortfolioFields, Project, Skill,
};
