use crate::contact::NearbyContact;

const DEFAULT_INTENT: &str = "say hello and see if they're free";

/// Prompt for a short opening message
pub fn icebreaker(contact: &NearbyContact, intent: &str) -> String {
    let intent = match intent.trim() {
        "" => DEFAULT_INTENT,
        s => s,
    };
    format!(
        "You are helping someone message a friend who happens to be nearby.\n\
         Friend: {name}, about {distance:.2} km away.\n\
         What they want: {intent}\n\
         Write one short, warm, casual text message (under 40 words) they could send to {name}. \
         Reply with the message only.",
        name = contact.contact.name,
        distance = contact.distance_km,
        intent = intent,
    )
}

/// Prompt for a meeting point between the user and a contact
pub fn meetup(contact: &NearbyContact, user_location: &str) -> String {
    format!(
        "Two friends want to meet up in person.\n\
         One is at coordinates {user}. The other, {name}, is at {theirs}, about {distance:.2} km away.\n\
         Suggest one specific, public, easy-to-find place roughly between them \
         (a cafe, park entrance or landmark) and give one sentence on why it works. \
         Keep it under 50 words.",
        user = user_location,
        name = contact.contact.name,
        theirs = contact.contact.position,
        distance = contact.distance_km,
    )
}
