/*
[INPUT]:  Interactive user input via terminal prompts
[OUTPUT]: Config files and registration profiles
[POS]:    CLI interaction layer
[UPDATE]: When prompts or generated files change
*/

pub mod init;
pub mod prompt;
