use super::EmailMessage;

fn wrap(body: &str) -> String {
    format!(
        "<div style=\"font-family: sans-serif; max-width: 560px; margin: 0 auto;\">{body}\
         <p style=\"color: #888; font-size: 12px;\">LeadBridge</p></div>"
    )
}

pub fn verification(to: &str, name: &str, link: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Verify your email".to_string(),
        html: wrap(&format!(
            "<h2>Welcome, {name}!</h2>\
             <p>Confirm your email address to finish setting up your account.</p>\
             <p><a href=\"{link}\">Verify email</a></p>\
             <p>This link expires in 24 hours.</p>"
        )),
    }
}

pub fn booking_confirmation(to: &str, name: &str, event_title: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: format!("Booking received: {event_title}"),
        html: wrap(&format!(
            "<h2>Thanks, {name}</h2>\
             <p>Your booking for <strong>{event_title}</strong> has been received. \
             The host will be in touch once it is confirmed.</p>"
        )),
    }
}

pub fn new_verified_lead(to: &str, event_title: &str, link: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: format!("New verified lead for {event_title}"),
        html: wrap(&format!(
            "<h2>You have a new lead</h2>\
             <p>A verified attendee booked <strong>{event_title}</strong>.</p>\
             <p><a href=\"{link}\">View your leads</a></p>"
        )),
    }
}

pub fn mentor_decision(to: &str, name: &str, approved: bool) -> EmailMessage {
    let (subject, line) = if approved {
        (
            "Your mentor profile is approved",
            "You can now publish events and receive leads.",
        )
    } else {
        (
            "Your mentor profile was not approved",
            "Please review your profile details and contact support if you have questions.",
        )
    };
    EmailMessage {
        to: to.to_string(),
        subject: subject.to_string(),
        html: wrap(&format!("<h2>Hi {name}</h2><p>{line}</p>")),
    }
}

pub fn invitation(
    to: &str,
    name: &str,
    event_title: &str,
    ticket_price: f64,
    link: &str,
) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: format!("You're invited to {event_title}"),
        html: wrap(&format!(
            "<h2>Hi {name}</h2>\
             <p>The host of <strong>{event_title}</strong> has invited you. \
             Your ticket price is {ticket_price:.2}.</p>\
             <p><a href=\"{link}\">View invitation</a></p>"
        )),
    }
}
