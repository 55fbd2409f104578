pub const APP_TITLE: &str = "SecuAPI Scanner";
pub const PROMPT: &str = "> ";
pub const RESULTS_HEADING: &str = "Scan Results";

pub const HELP_TEXT: &str = "\
Commands:
  url <value>          set the base url
  set <row> <value>    edit endpoint row <row>
  add                  add an empty endpoint row
  submit               send the scan request
  cancel               abandon the pending request
  show                 redraw the form
  help                 show this text
  quit                 exit";
