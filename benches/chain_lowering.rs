//! Benchmarks for lowering assignment chains.
//!
//! Measures chains of increasing length over accessor-backed properties
//! (one shared temporary, N setter calls) and over mutable value-typed
//! locals (N clones).
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use bumpalo::Bump;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sablejs::prelude::*;
use std::hint::black_box;

const INT: &str = "Int32";
const CHAIN_LENGTHS: [usize; 4] = [2, 8, 32, 128];

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

fn this<'a>(arena: &'a Bump) -> &'a Expr<'a> {
    arena.alloc(Expr::This(ThisExpr {
        ty: TypeRef::new("C"),
        span: Span::default(),
    }))
}

fn local<'a>(arena: &'a Bump, name: &'a str) -> &'a Expr<'a> {
    let local = arena.alloc(LocalSymbol {
        name,
        ty: TypeRef::new(INT),
        flags: SymbolFlags::empty(),
    });
    arena.alloc(Expr::Local(LocalExpr {
        local,
        span: Span::default(),
    }))
}

fn property<'a>(arena: &'a Bump, name: &'a str) -> &'a Expr<'a> {
    let property = arena.alloc(PropertySymbol {
        name,
        declaring_type: TypeRef::new("C"),
        ty: TypeRef::new(INT),
        params: &[],
        flags: SymbolFlags::empty(),
    });
    arena.alloc(Expr::Property(arena.alloc(PropertyExpr {
        receiver: Receiver::Instance(this(arena)),
        property,
        span: Span::default(),
    })))
}

fn call<'a>(arena: &'a Bump, name: &'a str) -> &'a Expr<'a> {
    let method = arena.alloc(MethodSymbol {
        name,
        declaring_type: TypeRef::new("C"),
        return_type: TypeRef::new(INT),
        params: &[],
    });
    arena.alloc(Expr::Call(arena.alloc(CallExpr {
        receiver: Receiver::Instance(this(arena)),
        method,
        args: &[],
        span: Span::default(),
    })))
}

/// Build `t0 = t1 = ... = t(n-1) = value` right-associatively.
fn chain<'a>(
    arena: &'a Bump,
    length: usize,
    target: impl Fn(&'a Bump, &'a str) -> &'a Expr<'a>,
    value: &'a Expr<'a>,
) -> &'a AssignExpr<'a> {
    let mut current = value;
    for i in (1..length).rev() {
        let name = arena.alloc_str(&format!("T{i}"));
        let assign = arena.alloc(AssignExpr {
            target: target(arena, name),
            op: AssignOp::Assign,
            value: current,
            span: Span::default(),
        });
        current = arena.alloc(Expr::Assign(assign));
    }
    arena.alloc(AssignExpr {
        target: target(arena, "T0"),
        op: AssignOp::Assign,
        value: current,
        span: Span::default(),
    })
}

fn lower_once(metadata: &MetadataRegistry, options: &LoweringOptions, assign: &AssignExpr<'_>) -> usize {
    let mut temps = TemporaryAllocator::for_options(options);
    let mut diagnostics = Diagnostics::new();
    let enclosing = EnclosingMember::method(TypeRef::new("C"));
    let mut ctx = LoweringContext::new(metadata, &mut temps, &mut diagnostics, options, enclosing);
    let lowered = lower_assignment(assign, ValueUsage::Discarded, &mut ctx);
    end_profiling_frame();
    lowered.statements.len()
}

fn property_chains(c: &mut Criterion) {
    setup_profiler();
    let metadata = MetadataRegistry::new();
    let options = LoweringOptions::default();

    let mut group = c.benchmark_group("lowering/property_chain");
    for length in CHAIN_LENGTHS {
        let arena = Bump::new();
        let assign = chain(&arena, length, property, call(&arena, "F"));
        group.throughput(Throughput::Elements(length as u64));
        group.bench_with_input(BenchmarkId::from_parameter(length), &assign, |b, assign| {
            b.iter(|| black_box(lower_once(&metadata, &options, black_box(assign))));
        });
    }
    group.finish();
}

fn value_type_chains(c: &mut Criterion) {
    setup_profiler();
    let mut metadata = MetadataRegistry::new();
    metadata.register_type(INT, TypeSemantics::mutable("to_Int32"));
    let options = LoweringOptions::default();

    let mut group = c.benchmark_group("lowering/value_type_chain");
    for length in CHAIN_LENGTHS {
        let arena = Bump::new();
        let assign = chain(&arena, length, local, local(&arena, "$source"));
        group.throughput(Throughput::Elements(length as u64));
        group.bench_with_input(BenchmarkId::from_parameter(length), &assign, |b, assign| {
            b.iter(|| black_box(lower_once(&metadata, &options, black_box(assign))));
        });
    }
    group.finish();
}

criterion_group!(benches, property_chains, value_type_chains);
criterion_main!(benches);
