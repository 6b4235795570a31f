use ls8::{
    emulator::{Emulator, Output, TestIo, STACK_BASE},
    program::Program,
};

fn read_program(source: &str) -> Program {
    Program::parse(source).expect("could not parse program")
}

fn run(source: &str) -> Emulator<TestIo> {
    let program = read_program(source);
    let mut e = Emulator::new(&program, TestIo::new());

    while !e.halted {
        println!("{:?}", e.fetch());
        e.step().expect("error while executing the program");
        println!("{}", e.context);
    }

    e
}

#[test]
fn test_print8_read_program() {
    let p = read_program(include_str!("print8.ls8"));

    assert_eq!(p.as_bytes(), &[0b1000_0010, 0, 8, 0b0100_0111, 0, 1]);
    assert_eq!(p.heap_boundary(), 6);
}

#[test]
fn test_print8() {
    let e = run(include_str!("print8.ls8"));

    assert_eq!(e.io.output(), &[Output::Number(8)]);
    assert_eq!(e.context.cycles, 3);
}

#[test]
fn test_mult() {
    let e = run(include_str!("mult.ls8"));

    assert_eq!(e.io.text(), "72");
}

#[test]
fn test_call() {
    let e = run(include_str!("call.ls8"));

    assert_eq!(e.io.into_output(), vec![
        Output::Number(20),
        Output::Number(30),
        Output::Number(36),
        Output::Number(60),
    ]);
}

#[test]
fn test_call_restores_stack_pointer() {
    let e = run(include_str!("call.ls8"));

    assert_eq!(e.context.r[7], STACK_BASE);
    // The last return address pushed was the HLT at 23.
    assert_eq!(e.memory.read(STACK_BASE - 1), 23);
}

#[test]
fn test_stack() {
    let e = run(include_str!("stack.ls8"));

    assert_eq!(e.io.output(), &[Output::Number(2), Output::Number(1)]);
    assert_eq!(e.context.r[7], STACK_BASE);
}

#[test]
fn test_compare_takes_branch() {
    let e = run(include_str!("compare.ls8"));

    assert_eq!(e.io.output(), &[Output::Number(2)]);
    assert_eq!(e.context.flags.as_byte(), 0b001);
}

#[test]
fn test_printstr() {
    let e = run(include_str!("printstr.ls8"));

    assert_eq!(e.heap_boundary(), 12);
    assert_eq!(e.io.text(), "HI");
}

#[test]
fn test_disassembly_round_trip() {
    for source in [
        include_str!("print8.ls8"),
        include_str!("mult.ls8"),
        include_str!("call.ls8"),
        include_str!("stack.ls8"),
        include_str!("compare.ls8"),
        include_str!("printstr.ls8"),
    ].iter() {
        let p = read_program(source);
        let listing = p.to_source();

        assert_eq!(read_program(&listing), p, "{}", listing);
    }
}

#[test]
fn test_call_listing() {
    let listing = read_program(include_str!("call.ls8")).to_source();
    let annotated: Vec<&str> = listing
        .lines()
        .filter_map(|line| line.split('#').nth(1))
        .map(str::trim)
        .collect();

    assert_eq!(&annotated[..4], &["LDI R1, 24", "LDI R0, 10", "CALL R1", "LDI R0, 15"]);
    assert_eq!(&annotated[annotated.len() - 4..], &["HLT", "ADD R0, R0", "PRN R0", "RET"]);
}
