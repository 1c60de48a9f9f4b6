pub mod sign_xpi;
