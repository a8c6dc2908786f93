//! Host functions registered by the `dry` binary.

use dry_webview::{Api, CallableError, MessageSender, Value};

/// Greeting pushed to script by `greet`.
pub const GREETING: &str = "Hello, World! from Rust";

/// Build the demo API. `greet` pushes through `sender`.
pub fn demo_api(sender: MessageSender) -> Api {
    Api::new()
        .with("add", add)
        .with("math.mul", mul)
        .with("hello", hello)
        .with("echo", echo)
        .with("greet", move |_| {
            tracing::info!("greet called");
            sender.send_message(GREETING)?;
            Ok(Value::Null)
        })
}

/// Sum of numeric arguments. Stays an integer unless a float is involved.
fn add(args: Vec<Value>) -> Result<Value, CallableError> {
    fold_numbers("add", &args, 0, |a, b| a.checked_add(b), |a, b| a + b)
}

fn mul(args: Vec<Value>) -> Result<Value, CallableError> {
    fold_numbers("math.mul", &args, 1, |a, b| a.checked_mul(b), |a, b| a * b)
}

fn fold_numbers(
    name: &str,
    args: &[Value],
    identity: i64,
    int_op: impl Fn(i64, i64) -> Option<i64>,
    float_op: impl Fn(f64, f64) -> f64,
) -> Result<Value, CallableError> {
    if args.iter().all(|a| matches!(a, Value::Int(_))) {
        let mut acc = identity;
        for arg in args {
            if let Value::Int(i) = arg {
                acc = int_op(acc, *i).ok_or_else(|| format!("{name}: integer overflow"))?;
            }
        }
        return Ok(Value::Int(acc));
    }

    let mut acc = identity as f64;
    for arg in args {
        let n = arg
            .as_f64()
            .ok_or_else(|| format!("{name} expects numbers, got {}", arg.kind()))?;
        acc = float_op(acc, n);
    }
    Ok(Value::Float(acc))
}

fn hello(args: Vec<Value>) -> Result<Value, CallableError> {
    let names = args
        .iter()
        .map(|a| a.as_str().ok_or_else(|| format!("hello expects strings, got {}", a.kind())))
        .collect::<Result<Vec<_>, _>>()?;
    let message = format!("Hello {}", names.join(", "));
    tracing::info!("{message}");
    Ok(Value::String(message))
}

/// One argument comes back as is; several come back as a list.
fn echo(mut args: Vec<Value>) -> Result<Value, CallableError> {
    Ok(match args.len() {
        0 => Value::Null,
        1 => args.remove(0),
        _ => Value::List(args),
    })
}
