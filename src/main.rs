use std::process::exit;

use spvscan::spv::{print, Module, ParseConfig, PipelineInfo, SpirvBinary};

fn main() {
    env_logger::init();

    let mut strict = false;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--strict" => strict = true,
            _ => path = Some(arg),
        }
    }
    let path = match path {
        Some(path) => path,
        None => {
            println!("error: no input file");
            exit(1);
        }
    };

    let binary = match SpirvBinary::from_file(&path) {
        Ok(binary) => binary,
        Err(err) => {
            println!("error: {}", err);
            exit(2);
        }
    };
    let config = ParseConfig { strict };
    let module = match Module::parse_with_config(&binary, &config) {
        Ok(module) => module,
        Err(err) => {
            println!("error: {}", err);
            exit(2);
        }
    };

    print!("{}", print::module_summary(&module));
    print!("{}", print::type_report(&module));
    match PipelineInfo::reflect(&module) {
        Ok(info) => print!("{}", print::pipeline_report(&info)),
        Err(err) => {
            println!("error: {}", err);
            exit(2);
        }
    }
}
