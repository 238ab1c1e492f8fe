/*
[INPUT]:  Registration flags, falling back to terminal prompts
[OUTPUT]: ProfileInput ready for registration
[POS]:    CLI interaction layer - register command
[UPDATE]: When registration profile fields change
*/

use anyhow::Result;
use dialoguer::{Input, Select, theme::ColorfulTheme};

use eventpass_wallet_auth::{ProfileInput, UserRole};

/// Profile fields given on the command line; missing ones are prompted for
#[derive(Debug, Default)]
pub struct ProfileArgs {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub organization_name: Option<String>,
    pub organization_description: Option<String>,
}

pub fn collect_profile(args: ProfileArgs) -> Result<ProfileInput> {
    let theme = ColorfulTheme::default();

    let name = match args.name {
        Some(name) => name,
        None => Input::with_theme(&theme)
            .with_prompt("Display name")
            .interact_text()?,
    };
    let email = match args.email {
        Some(email) => email,
        None => Input::with_theme(&theme)
            .with_prompt("Email")
            .interact_text()?,
    };
    let role = match args.role {
        Some(role) => role,
        None => {
            let roles = [UserRole::Attendee, UserRole::Organizer];
            let labels = roles.map(UserRole::as_str);
            let index = Select::with_theme(&theme)
                .with_prompt("Role")
                .items(&labels)
                .default(0)
                .interact()?;
            roles[index]
        }
    };

    let mut profile = ProfileInput::new(name, email, role);
    if role == UserRole::Organizer {
        let organization = match args.organization_name {
            Some(organization) => organization,
            None => Input::with_theme(&theme)
                .with_prompt("Organization name")
                .interact_text()?,
        };
        profile = profile.with_organization(organization, args.organization_description);
    }
    Ok(profile)
}
