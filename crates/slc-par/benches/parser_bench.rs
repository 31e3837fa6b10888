use criterion::{black_box, criterion_group, criterion_main, Criterion};
use slc_lex::Lexer;
use slc_par::Parser;
use slc_util::{Pool, Reporter};

const SOURCE: &str = r#"
struct Point {
    x int;
    y int;
}

func distance(a Point, b Point) -> float {
    var dx int = a.x - b.x;
    var dy int = a.y - b.y;
    return dx * dx + dy * dy;
}

func main() -> int {
    var i int = 0;
    while (i < 100) {
        if (i % 2 == 0) {
            print("even");
        } else {
            print("odd");
        }
        i = i + 1;
    }
    return 0;
}
"#;

fn parse_all(source: &str) {
    let pool = Pool::new();
    let lexer = Lexer::new(&pool, "bench.sl", source);
    let mut reporter = Reporter::new();
    let parser = Parser::new(lexer, &mut reporter);
    let program = parser.parse(&mut reporter);
    black_box(&program);
}

fn bench_parser(c: &mut Criterion) {
    c.bench_function("parse_small_program", |b| {
        b.iter(|| parse_all(black_box(SOURCE)))
    });
}

criterion_group!(benches, bench_parser);
criterion_main!(benches);
