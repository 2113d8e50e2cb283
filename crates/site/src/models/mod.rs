//! Domain models for the site.

pub mod admin_user;
pub mod donation;
pub mod expenditure;
pub mod session;

pub use admin_user::{AdminUser, CreateAdminInput, UpdatePasswordInput};
pub use donation::{
    CheckDonationInput, Donation, NewDonation, SubmitDonationInput, UpdateDonationStatusInput,
};
pub use expenditure::{
    CreateExpenditureInput, DeleteExpenditureInput, Expenditure, ExpenditurePatch,
    NewExpenditure, UpdateExpenditureInput,
};
pub use session::{CurrentAdmin, ENV_SUPER_ADMIN_SUBJECT, SessionClaims, SessionSubject};
