/// Available commands and autocomplete logic

/// What running a command does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
  OpenDashboard,
  OpenEmployees,
  OpenPostNotice,
  Logout,
  Quit,
}

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
  pub action: CommandAction,
  /// Only offered to super users
  pub admin_only: bool,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "dashboard",
    aliases: &["d", "home"],
    description: "Profile and notices",
    action: CommandAction::OpenDashboard,
    admin_only: false,
  },
  Command {
    name: "employees",
    aliases: &["e", "emp", "users"],
    description: "Employee directory",
    action: CommandAction::OpenEmployees,
    admin_only: true,
  },
  Command {
    name: "notice",
    aliases: &["n", "post"],
    description: "Post a notice",
    action: CommandAction::OpenPostNotice,
    admin_only: true,
  },
  Command {
    name: "logout",
    aliases: &["signout"],
    description: "Sign out",
    action: CommandAction::Logout,
    admin_only: false,
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit hrdesk",
    action: CommandAction::Quit,
    admin_only: false,
  },
];

/// Get autocomplete suggestions for a given input, limited to the
/// commands the current user may run
pub fn get_suggestions(input: &str, is_admin: bool) -> Vec<&'static Command> {
  let input_lower = input.trim().to_lowercase();
  let available = COMMANDS.iter().filter(|cmd| is_admin || !cmd.admin_only);

  if input_lower.is_empty() {
    return available.collect();
  }

  let mut matches: Vec<(&Command, u32)> = available
    .filter_map(|cmd| match_rank(cmd, &input_lower).map(|rank| (cmd, rank)))
    .collect();

  // Stable, so equal ranks keep declaration order
  matches.sort_by_key(|(_, rank)| *rank);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// Lower is better; `None` means no match
fn match_rank(cmd: &Command, input: &str) -> Option<u32> {
  if cmd.name == input {
    Some(0)
  } else if cmd.aliases.contains(&input) {
    Some(1)
  } else if cmd.name.starts_with(input) {
    Some(2)
  } else if cmd.aliases.iter().any(|a| a.starts_with(input)) {
    Some(3)
  } else if cmd.name.contains(input) {
    Some(4)
  } else if cmd.aliases.iter().any(|a| a.contains(input)) {
    Some(5)
  } else {
    None
  }
}
