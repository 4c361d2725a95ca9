use clap::{crate_version, Arg, ArgAction, Command, ValueHint};

const LINK_HELP: &str = "the export table lists sections as `name start size flags`
followed by exported labels as `name value`, all tab separated";
const CONFIG_LONG_HELP: &str = "JSON object with optional keys:
  strict   (bool) exit with failure if any line had an error
  listing  (bool) print the assembly listing to stdout
  elfFlags (bool) add AX/WA flags to the export table";

fn pattern_arg() -> Arg {
    Arg::new("pattern").help("pattern file describing the instruction set")
        .value_name("PATTERN")
        .value_hint(ValueHint::FilePath)
        .required(true)
}

fn output_arg() -> Arg {
    Arg::new("output").short('o').long("output").help("binary image to create")
        .value_name("PATH")
        .value_hint(ValueHint::FilePath)
        .required(false)
}

fn import_arg() -> Arg {
    Arg::new("import").short('i').long("import").help("label file to read before assembly")
        .value_name("PATH")
        .value_hint(ValueHint::FilePath)
        .long_help("each line of the file is `section label value`")
        .required(false)
}

pub fn build_cli() -> Command {
    let long_help = "patasm is always invoked with exactly one of several subcommands.
The instruction set is described by a pattern file, the source is assembled in two passes.
Set RUST_LOG environment variable to control logging level.
  levels: trace,debug,info,warn,error

Examples:
---------
assemble:              `patasm asm z80.axx prog.s -o prog.bin`
assemble and export:   `patasm asm z80.axx prog.s -o prog.bin -e prog.tsv`
link with labels:      `patasm asm z80.axx main.s -i prog.tsv -o main.bin`
interactive:           `patasm repl z80.axx`";

    let mut main_cmd = Command::new("patasm")
        .about("Assembles programs for any instruction set described by a pattern file.")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(
        Command::new("asm")
            .arg(pattern_arg())
            .arg(
                Arg::new("source").help("assembly source file")
                    .value_name("SOURCE")
                    .value_hint(ValueHint::FilePath)
                    .required(true),
            )
            .arg(output_arg())
            .arg(
                Arg::new("export").short('e').long("export").help("write label export table")
                    .value_name("PATH")
                    .value_hint(ValueHint::FilePath)
                    .conflicts_with("export_elf")
                    .required(false),
            )
            .arg(
                Arg::new("export_elf").short('E').long("export-elf").help("write label export table with ELF flags")
                    .value_name("PATH")
                    .value_hint(ValueHint::FilePath)
                    .required(false),
            )
            .arg(import_arg())
            .arg(
                Arg::new("config").long("config").help("JSON settings file")
                    .value_name("PATH")
                    .value_hint(ValueHint::FilePath)
                    .long_help(CONFIG_LONG_HELP)
                    .required(false),
            )
            .arg(
                Arg::new("quiet").short('q').long("quiet").help("suppress the listing")
                    .action(ArgAction::SetTrue),
            )
            .about("assemble a source file in two passes")
            .after_help(LINK_HELP),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("repl")
            .arg(pattern_arg())
            .arg(output_arg())
            .arg(import_arg())
            .about("assemble lines from stdin as they are entered")
            .after_help("enter `?` to print the labels, end input to quit"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("completions")
            .arg(
                Arg::new("shell").short('s').long("shell").help("shell target").value_name("NAME")
                    .required(true)
                    .value_parser(["bash","elv","fish","ps1","zsh"])
            )
            .about("write completions script to stdout for the specified shell")
    );
    return main_cmd;
}
