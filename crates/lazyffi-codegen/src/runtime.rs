//! The host-side runtime prelude.
//!
//! Generated modules call into these helpers: `__force` and `__lazy` for
//! deferred cells, `__ret`/`__bind`/`__then`/`__io` for actions, and
//! `__toHost`/`__fromHost` for conversion over the same descriptor literals
//! the Rust codec reads. User types are converted through the `__cases`
//! table filled by `__case` calls in declaration order.

/// Names the prelude defines. Generated bindings must not reuse them.
pub const RUNTIME_NAMES: &[&str] = &[
    "__Thunk",
    "__lazy",
    "__force",
    "__Cons",
    "__nil",
    "__list",
    "__Monad",
    "__ret",
    "__bind",
    "__then",
    "__io",
    "__Rec",
    "__eq",
    "__cases",
    "__case",
    "__inst",
    "__toHost",
    "__exportFn",
    "__encodeUser",
    "__fromHost",
    "__importFn",
    "__decodeUser",
];

/// Source of the prelude.
pub const PRELUDE: &str = r#"// ── thunks ──
function __Thunk(f) { this.f = f; this.v = null; this.s = 0; }
function __lazy(f) { return new __Thunk(f); }
function __force(x, noCache) {
  while (x instanceof __Thunk) {
    if (noCache && x.f !== null) {
      x = x.f();
    } else if (x.s === 2) {
      x = x.v;
    } else if (x.s === 1) {
      throw new Error("<<loop>>");
    } else {
      x.s = 1;
      x.v = __force(x.f(), false);
      x.s = 2;
      x = x.v;
    }
  }
  return x;
}

// ── lists & records ──
function __Cons(h, t) { this.h = h; this.t = t; }
var __nil = { nil: true };
function __list(xs) {
  var l = __nil;
  for (var i = xs.length - 1; i >= 0; i--) {
    l = new __Cons(xs[i], l);
  }
  return l;
}
function __Rec(con, fields) { this.con = con; this.fields = fields; }

// ── actions ──
function __Monad(v) { this.v = v; }
function __ret(v) { return new __Monad(v); }
function __bind(m, f) {
  return __lazy(function () {
    var r = __force(m, true);
    return __force(__force(f)(r.v), true);
  });
}
function __then(m, k) {
  return __lazy(function () {
    __force(m, true);
    return __force(k, true);
  });
}
function __io(f) {
  return __lazy(function () { return new __Monad(f()); });
}

// ── equality ──
function __eq(a, b) {
  a = __force(a);
  b = __force(b);
  if (a === b) {
    return true;
  }
  if (a instanceof Array && b instanceof Array) {
    if (a.length !== b.length) {
      return false;
    }
    for (var i = 0; i < a.length; i++) {
      if (!__eq(a[i], b[i])) {
        return false;
      }
    }
    return true;
  }
  if (a instanceof __Cons && b instanceof __Cons) {
    while (a instanceof __Cons && b instanceof __Cons) {
      if (!__eq(a.h, b.h)) {
        return false;
      }
      a = __force(a.t);
      b = __force(b.t);
    }
    return a === __nil && b === __nil;
  }
  if (a instanceof __Rec && b instanceof __Rec) {
    if (a.con !== b.con) {
      return false;
    }
    var ks = Object.keys(a.fields);
    for (var j = 0; j < ks.length; j++) {
      if (!(ks[j] in b.fields) || !__eq(a.fields[ks[j]], b.fields[ks[j]])) {
        return false;
      }
    }
    return true;
  }
  return false;
}

// ── dispatch ──
var __cases = [];
function __case(type, con, fields) {
  __cases.push({ type: type, con: con, fields: fields });
}
function __inst(d, gs) {
  if (d[0] === "unknown") {
    return d.length > 1 && d[1] < gs.length ? gs[d[1]] : d;
  }
  if (d[0] === "automatic" || d[0] === "user") {
    return [d[0], d[1], d[2].map(function (g) { return __inst(g, gs); })];
  }
  var out = [d[0]];
  for (var i = 1; i < d.length; i++) {
    out.push(__inst(d[i], gs));
  }
  return out;
}

// ── outward ──
function __toHost(d, v) {
  var tag = d[0];
  if (tag === "ptr" || tag === "unknown") {
    return v;
  }
  if (tag === "action") {
    return function () { return __toHost(d[1], __force(v, true).v); };
  }
  if (tag === "function") {
    return __exportFn(d, v);
  }
  v = __force(v);
  if (tag === "int" || tag === "double" || tag === "bool") {
    return v;
  }
  if (tag === "string") {
    var s = "";
    while (v instanceof __Cons) {
      s += __force(v.h);
      v = __force(v.t);
    }
    return s;
  }
  if (tag === "list") {
    var xs = [];
    while (v instanceof __Cons) {
      xs.push(__toHost(d[1], v.h));
      v = __force(v.t);
    }
    return xs;
  }
  if (tag === "tuple") {
    var ts = [];
    for (var i = 1; i < d.length; i++) {
      if (!(v instanceof __Cons)) {
        throw new Error("tuple of " + (d.length - 1) + " elements ended after " + (i - 1));
      }
      ts.push(__toHost(d[i], v.h));
      v = __force(v.t);
    }
    return ts;
  }
  if (tag === "defined") {
    return v.con === "Defined" ? __toHost(d[1], v.fields.value) : undefined;
  }
  if (tag === "nullable") {
    return v.con === "Nullable" ? __toHost(d[1], v.fields.value) : null;
  }
  return __encodeUser(d, v);
}
function __exportFn(d, f) {
  var n = d.length - 2;
  var ret = d[d.length - 1];
  if (n < 1) {
    throw new Error("nullary function");
  }
  return function () {
    var r = f;
    for (var i = 0; i < n; i++) {
      r = __force(r);
      if (typeof r !== "function") {
        return r;
      }
      r = r(__fromHost(d[i + 1], arguments[i]));
    }
    if (ret[0] === "action") {
      return __toHost(ret[1], __force(r, true).v);
    }
    return __toHost(ret, r);
  };
}
function __encodeUser(d, v) {
  if (!(v instanceof __Rec)) {
    return v;
  }
  for (var i = 0; i < __cases.length; i++) {
    var c = __cases[i];
    if (c.con === v.con) {
      var o = {};
      for (var j = 0; j < c.fields.length; j++) {
        var f = c.fields[j];
        var x = __toHost(__inst(f[1], d[2]), v.fields[f[0]]);
        if (x !== undefined) {
          o[f[0]] = x;
        }
      }
      o["$tag"] = c.con;
      return o;
    }
  }
  return v;
}

// ── inward ──
function __fromHost(d, h) {
  var tag = d[0];
  if (tag === "ptr" || tag === "unknown") {
    return h;
  }
  if (tag === "int") {
    if (Math.round(h) !== h) {
      throw new Error("expected an integral number, got " + h);
    }
    if (Math.abs(h) > 9007199254740991) {
      throw new Error("integer " + h + " is outside the host's exact integer range");
    }
    return h;
  }
  if (tag === "double" || tag === "bool") {
    return h;
  }
  if (tag === "string") {
    return __list(h.split(""));
  }
  if (tag === "list") {
    return __list(h.map(function (x) { return __fromHost(d[1], x); }));
  }
  if (tag === "tuple") {
    var xs = [];
    for (var i = 1; i < d.length; i++) {
      xs.push(__fromHost(d[i], h[i - 1]));
    }
    return __list(xs);
  }
  if (tag === "action") {
    return new __Monad(__fromHost(d[1], h));
  }
  if (tag === "function") {
    return __importFn(d, h, []);
  }
  if (tag === "defined") {
    return h === undefined ? new __Rec("Undefined", {}) : new __Rec("Defined", { value: __fromHost(d[1], h) });
  }
  if (tag === "nullable") {
    return h === null ? new __Rec("Null", {}) : new __Rec("Nullable", { value: __fromHost(d[1], h) });
  }
  return __decodeUser(d, h);
}
function __importFn(d, f, args) {
  if (d.length < 3) {
    throw new Error("nullary function");
  }
  return function (x) {
    var next = args.concat([__toHost(d[args.length + 1], x)]);
    if (next.length < d.length - 2) {
      return __importFn(d, f, next);
    }
    var ret = d[d.length - 1];
    if (ret[0] === "action") {
      return __io(function () { return __fromHost(ret[1], f.apply(null, next)); });
    }
    return __fromHost(ret, f.apply(null, next));
  };
}
function __decodeUser(d, h) {
  if (h === null || typeof h !== "object") {
    return h;
  }
  var tag = h["$tag"];
  for (var i = 0; i < __cases.length; i++) {
    var c = __cases[i];
    if (c.type === d[1] && c.con === tag) {
      var fields = {};
      for (var j = 0; j < c.fields.length; j++) {
        var f = c.fields[j];
        fields[f[0]] = __fromHost(__inst(f[1], d[2]), h[f[0]]);
      }
      return new __Rec(c.con, fields);
    }
  }
  return h;
}
"#;
