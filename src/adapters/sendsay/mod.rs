//! Sendsay email adapter.

mod sendsay_mailer;

pub use sendsay_mailer::SendsayMailer;
