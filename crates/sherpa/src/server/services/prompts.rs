//! Prompt templates for insight generation
//!
//! Both builders embed user text verbatim. Length and content checks are the
//! caller's job.

/// Prompt asking for coaching feedback on a meeting transcript
pub fn build_transcript_prompt(
  transcript: &str,
  company_name: &str,
  attendees: &[String],
  date: &str,
) -> String {
  let attendees = attendees.join(", ");
  format!(
    "You are a business coach analyzing meeting transcripts to provide actionable insights.\n\
\n\
Review this transcript and share what I did well and why, what I could do even better and \
recommendations of things I can test differently next time.\n\
\n\
Company: {company_name}\n\
Attendees: {attendees}\n\
Date: {date}\n\
\n\
Transcript:\n\
{transcript}\n"
  )
}

/// Prompt asking for a sales outreach analysis from a LinkedIn bio and pitch deck
pub fn build_linkedin_prompt(bio: &str, pitch_deck: &str, company_name: &str, role: &str) -> String {
  format!(
    "You are a sales strategist creating personalized outreach strategies.\n\
\n\
Based on this LinkedIn bio and pitch deck, generate a cold outreach icebreaker for this person.\n\
\n\
LinkedIn Bio:\n\
{bio}\n\
\n\
Pitch Deck:\n\
{pitch_deck}\n\
\n\
Company: {company_name}\n\
Role: {role}\n\
\n\
Please provide:\n\
1. Buying signals from the deck\n\
2. Why they matter and source of information\n\
3. Discovery triggers\n\
4. Smart questions to ask in the next call\n\
5. Preferred style of buying and how you inferred that\n\
6. Top 5 things they would like from our deck\n\
7. What parts may not be clear, relevant or valuable and why\n\
8. What to do instead\n\
9. Short summary and 3 reflection questions\n"
  )
}
