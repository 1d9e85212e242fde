/// Fixed Secret Santa announcement, rendered per recipient.
///
/// Exactly two placeholders: `{username}` (the recipient's own display name)
/// and `{target}` (the giftee's display text from the pairing table).
pub const MESSAGE_TEMPLATE: &str = "\
🎁 Secret Santa 🎁

❄️❄️❄️❄️❄️❄️❄️❄️❄️❄️❄️❄️

Hey **{username}**!

The Guild Christmas event is near! 🎄🎄🎄

You are the Secret Santa for:
🎅❄️🎄 **{target}** 🎅❄️🎄

Make sure to wrap the item using gift wrap, which is sold by any general goods vendor.
You can also use festive paper from Winter's Veil!

There are no restrictions on what you can give, but please keep it appropriate and within budget.
You CANNOT wrap certain items, such as stackable items (e.g., potions, food, or Ice Cold Milk).

**The event is planned for the 21st of December at 21:30 CET (3:30 PM EST/NYC).**

Location Coordinates: Alterac Mountains, Chillwind Point 80.00 / 52.5
(Across the Warrior Quest Place)

Do not send your gift before then — everyone will trade each other their gifts at the same time!

If you won't be able to attend, please inform the organizer as soon as possible.

Enjoy the Christmas spirit! ☃️🧣

-------------------------------------------------
**CAUTION!!!!!**
*This is an automated message, please do not reply to this DM.*
**If you have any questions, please contact the organizer directly.**
";

/// Renders the announcement by literal substitution of the two placeholders.
pub fn render_announcement(username: &str, target: &str) -> String {
    MESSAGE_TEMPLATE
        .replace("{username}", username)
        .replace("{target}", target)
}
