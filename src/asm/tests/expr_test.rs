use super::{eval_asm,eval_pat};
use crate::asm::expr::Evaluator;
use crate::asm::{Context,Error};

mod arithmetic {
    use super::*;
    #[test]
    fn precedence() {
        assert_eq!(eval_asm("2+3*4"),14);
        assert_eq!(eval_asm("(2+3)*4"),20);
        assert_eq!(eval_asm("2 + 3 * 4 - 1"),13);
        assert_eq!(eval_asm("1<<8"),256);
        assert_eq!(eval_asm("1<<2+1"),8);
        assert_eq!(eval_asm("0x0f|0x30&0x10"),0x1f);
        assert_eq!(eval_asm("6^3|1"),5);
    }
    #[test]
    fn floor_division() {
        assert_eq!(eval_asm("7//2"),3);
        assert_eq!(eval_asm("-7//2"),-4);
        assert_eq!(eval_asm("7%3"),1);
        assert_eq!(eval_asm("-7%3"),2);
        assert_eq!(eval_asm("7%-3"),-2);
    }
    #[test]
    fn power_is_right_associative() {
        assert_eq!(eval_asm("2**3**2"),512);
        assert_eq!(eval_asm("2**10"),1024);
        assert_eq!(eval_asm("3*2**2"),12);
        assert_eq!(eval_asm("2**-1"),0);
    }
    #[test]
    fn division_by_zero() {
        let mut ctx = Context::new();
        let mut ev = Evaluator::assembly(&mut ctx);
        assert_eq!(ev.eval("7//0"),0);
        assert_eq!(ev.faults().len(),1);
        assert!(matches!(ev.faults()[0],Error::DivisionByZero));
        assert_eq!(ev.eval("5%0"),0);
        assert_eq!(ev.take_faults().len(),2);
        assert_eq!(ev.faults().len(),0);
    }
    #[test]
    fn shifts() {
        assert_eq!(eval_asm("0x1234>>8"),0x12);
        assert_eq!(eval_asm("-16>>2"),-4);
        assert_eq!(eval_asm("1<<200"),0);
        assert_eq!(eval_asm("-1>>200"),-1);
    }
}

mod logic {
    use super::*;
    #[test]
    fn ternary() {
        assert_eq!(eval_asm("1?2:3"),2);
        assert_eq!(eval_asm("0?2:3"),3);
        assert_eq!(eval_asm("2>1 ? 10 : 20"),10);
    }
    #[test]
    fn relational() {
        assert_eq!(eval_asm("1<2"),1);
        assert_eq!(eval_asm("2<=2"),1);
        assert_eq!(eval_asm("3>=4"),0);
        assert_eq!(eval_asm("5==5"),1);
        assert_eq!(eval_asm("5!=5"),0);
    }
    #[test]
    fn logical() {
        assert_eq!(eval_asm("1&&0"),0);
        assert_eq!(eval_asm("1||0"),1);
        assert_eq!(eval_asm("not(0)"),1);
        assert_eq!(eval_asm("not(3)"),0);
        assert_eq!(eval_asm("not(2>3)&&1"),1);
    }
    #[test]
    fn sign_extension() {
        assert_eq!(eval_asm("0xff'8"),-1);
        assert_eq!(eval_asm("0x7f'8"),0x7f);
        assert_eq!(eval_asm("0x1f0'4"),0);
    }
}

mod atoms {
    use super::*;
    #[test]
    fn literals() {
        assert_eq!(eval_asm("0b1011"),11);
        assert_eq!(eval_asm("0B11"),3);
        assert_eq!(eval_asm("0xfF"),255);
        assert_eq!(eval_asm("0XA0"),160);
        assert_eq!(eval_asm("1234"),1234);
    }
    #[test]
    fn characters() {
        assert_eq!(eval_asm("'A'"),65);
        assert_eq!(eval_asm("'\\n'"),10);
        assert_eq!(eval_asm("'\\t'"),9);
        assert_eq!(eval_asm("'\\''"),39);
        assert_eq!(eval_asm("'\\\\'"),92);
    }
    #[test]
    fn unary() {
        assert_eq!(eval_asm("-5+2"),-3);
        assert_eq!(eval_asm("~0"),-1);
        assert_eq!(eval_asm("@255"),8);
        assert_eq!(eval_asm("@256"),9);
        assert_eq!(eval_asm("@0"),0);
        assert_eq!(eval_asm("*(0x123456,1)"),0x1234);
    }
    #[test]
    fn pc_and_symbols() {
        let mut ctx = Context::new();
        ctx.pc = 0x100;
        ctx.symbols.set("Acc",7);
        let mut ev = Evaluator::assembly(&mut ctx);
        assert_eq!(ev.eval("$$+2"),0x102);
        assert_eq!(ev.eval("#ACC"),7);
        assert_eq!(ev.eval("#acc*2"),14);
        assert_eq!(ev.eval("#NONE"),0);
    }
    #[test]
    fn labels() {
        let mut ctx = Context::new();
        ctx.labels.insert("start",0x8000,".text");
        let mut ev = Evaluator::assembly(&mut ctx);
        assert_eq!(ev.eval("start+1"),0x8001);
        assert_eq!(ev.unresolved().len(),0);
        assert_eq!(ev.eval("missing+1"),1);
        assert_eq!(ev.unresolved(),&["missing".to_string()]);
        ev.clear_unresolved();
        assert_eq!(ev.unresolved().len(),0);
    }
}

mod modes {
    use super::*;
    #[test]
    fn bind_variables() {
        let mut ctx = Context::new();
        ctx.vars.put('x',5);
        let mut ev = Evaluator::pattern(&mut ctx);
        assert_eq!(ev.eval("x*2"),10);
        assert_eq!(ev.eval("y:=x+1"),6);
        assert_eq!(ev.ctx().vars.get('Y'),6);
    }
    #[test]
    fn assembly_mode_reads_labels() {
        let mut ctx = Context::new();
        ctx.vars.put('x',5);
        ctx.labels.insert("x",9,".text");
        assert_eq!(Evaluator::assembly(&mut ctx).eval("x"),9);
        assert_eq!(Evaluator::pattern(&mut ctx).eval("x"),5);
    }
    #[test]
    fn bundle_atoms() {
        let mut ctx = Context::new();
        ctx.bundle.stop = 1;
        ctx.bundle.slots = 3;
        assert_eq!(Evaluator::pattern(&mut ctx).eval("!!!!"),1);
        assert_eq!(Evaluator::pattern(&mut ctx).eval("!!!*2"),6);
        assert_eq!(Evaluator::assembly(&mut ctx).eval("!!!"),0);
        assert_eq!(eval_pat("!!!!"),0);
    }
    #[test]
    fn stop_character() {
        let mut ctx = Context::new();
        let mut ev = Evaluator::pattern(&mut ctx);
        let s: Vec<char> = "3+4".chars().collect();
        let (v,idx) = ev.expression_until(&s,0,'+');
        assert_eq!(v,3);
        assert_eq!(idx,1);
        let s: Vec<char> = "(3+4)+1".chars().collect();
        let (v,idx) = ev.expression_until(&s,0,'+');
        assert_eq!(v,7);
        assert_eq!(idx,5);
    }
}
